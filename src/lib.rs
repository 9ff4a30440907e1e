pub mod densemap;
pub mod eval;
pub mod fs;
pub mod graph;
pub mod load;
pub mod parse;
pub mod plan;
pub mod run;
pub mod scanner;
pub mod trace;

#[cfg(not(windows))]
use jemallocator::Jemalloc;

#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;
