//! External collaborators
//!
//! - [`browser`]: rendering seam (`BrowserLauncher` / `PageSession`) and the
//!   scoped `BrowserSession` guard
//! - [`webdriver`]: W3C WebDriver adapter for the rendering seam
//! - [`judge`]: color-judging model seam and the OpenAI adapter
//! - [`palette_image`]: screenshot quantization and legend composition

pub mod browser;
pub mod judge;
pub mod palette_image;
pub mod webdriver;

pub use browser::{BrowserLauncher, BrowserSession, PageSession, ScreenshotOptions, Viewport};
pub use judge::{ColorJudge, JudgeRequest, OpenAiJudge};
pub use webdriver::WebDriverLauncher;
