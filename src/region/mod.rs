//! Region Module
//!
//! Discovers the extent of a table by probing the Value Store. Table
//! dimensions are never stored; every boundary is found by reading.
//!
//! ## Probing
//! ```text
//!        A     B     C     D   ...   Z   ...  IV
//!   3  [id ] [name] [  ]                          <- header row: short probe A3:Z3,
//!   4  [ 1 ] [ x  ]                                  wide probe A3:IV3 only if full
//!   5  [ 2 ] [ y  ]
//!   6  [   ]                                      <- first empty cell in column A
//! ```
//! - last column: one past the last occupied header cell (`C` above)
//! - last row: consecutive occupied cells down the start column (3 above,
//!   header included), one request per row

mod resolver;

pub use resolver::{RegionResolver, TableRegion};
