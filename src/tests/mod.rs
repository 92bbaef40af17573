mod common;

mod expiration_boundaries;
