// Reports module - net worth series, statistics and chart periods

pub mod net_worth;
pub mod period;
pub mod stats;

pub use net_worth::{chart_data_between, get_chart_data, reconstruct, ChartDataPoint};
pub use period::{period_dates, Period};
pub use stats::{compute_stats, get_net_worth_stats, net_worth_stats_as_of, NetWorthStats};
