pub mod cancel;
pub mod chromium_page;
pub mod page_driver;
pub mod selectors;

pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use chromium_page::ChromiumPage;
pub use page_driver::{wait_visible, ElementState, PageDriver, Selector, WaitOutcome};
pub use selectors::Selectors;
