pub mod generator_parser;
pub mod primitive_parser;
pub mod riff_parser;
pub mod sample_parser;
pub mod sf2_parser;
pub mod sf2_types;
