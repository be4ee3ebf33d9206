pub mod zone_builder;
pub mod zone_params;
