pub mod alert;
pub mod app;
pub mod config;
pub mod error;
pub mod notify;
pub mod pricing;
pub mod report;
pub mod services;
pub mod startup;
pub mod util;

pub use alert::{AlertMode, BudgetCheck, BudgetStatus, check_budget, resolve_budget};
pub use app::{AppConfig, AppState};
pub use config::{MonitorConfig, RangeParams, load_config};
pub use error::{ApiError, AppError, Result};
pub use notify::{Channel, Delivery, NotifyError, send_all};
pub use pricing::{PriceRow, build_pricing_table, install_pricing, price_rows};
pub use report::{CostReport, CostShare, build_report, render_html, render_json, render_text};
pub use services::{AlertOutcome, AppServices, FetchSummary};
pub use startup::{AppPaths, ensure_app_data_dir};
pub use util::time::{Period, ResolvedRange, last_days, resolve_range, today_local};
