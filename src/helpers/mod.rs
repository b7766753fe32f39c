pub mod stats_helpers;
