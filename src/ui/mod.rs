//! Terminal handling and report presentation

mod echo;
pub mod theme;
mod widgets;

pub use echo::EchoGuard;
pub use theme::ThemeColors;
pub use widgets::{print_report_table, ReportTable};
