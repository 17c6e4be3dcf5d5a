//! Watch Lists
//!
//! Parses watch lists and industry lists, screens them one ticker at a
//! time, and ranks the results.

pub mod models;
pub mod ranker;
pub mod scanner;

pub use models::{parse_industry_list, parse_watchlist, ScanFailure, ScanReport, WatchlistEntry};
pub use ranker::{group_by_industry, rank_results, UNCLASSIFIED};
pub use scanner::WatchlistScanner;
