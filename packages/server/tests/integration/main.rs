mod analysis;
mod common;
mod remote;
