pub mod alert;
pub mod bar;
pub mod email;
pub mod position;
pub mod session;

pub use alert::{AlertBook, Condition, PriceAlert};
pub use bar::{Bar, Interval, Period, SymbolInfo};
pub use email::{EmailConfig, EmailMessage};
pub use position::PortfolioPosition;
pub use session::{Notification, Selection, Session};
