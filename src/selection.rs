// Row selection over a whole sheet table
//
// - series: revenue (configured row index) and net income (label match)
// - margin: scores every row for "gross margin %" and picks the latest point
// - component_ratio: recomputes the margin from revenue and gross profit rows

pub mod component_ratio;
pub mod margin;
pub mod series;

pub use component_ratio::component_ratio_margin;
pub use margin::{latest_gross_margin, rank_margin_rows, score_row, RowScore, ScoreDiagnostics};
pub use series::{net_income_series, revenue_series, RevenueRowMap};
