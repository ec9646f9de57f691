pub use pdp_indexer_logic::settings::Settings;
