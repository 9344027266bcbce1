mod fixtures;
mod purge;
mod sync;
