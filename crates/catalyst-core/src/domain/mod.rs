//! Canonical domain models and validation.

mod category;
mod event;
mod event_date;
mod fundamentals;
mod ticker;
mod timestamp;

pub use category::{CatalystCategory, EventStatus};
pub use event::{
    CatalystEvent, Confidence, Headline, OutcomeProbability, RawEvent, TradingScore,
};
pub use event_date::EventDate;
pub use fundamentals::{parse_number, parse_volume, Fundamentals};
pub use ticker::Ticker;
pub use timestamp::UtcDateTime;
