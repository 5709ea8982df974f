//! Byte level reading shared by the radkit format crates.
//!
//! Both the **RCF** flat archive and the **P3D** chunk format are little-endian binary
//! containers that are navigated by absolute offsets. [`ByteCursor`] wraps an owned or borrowed
//! buffer (a whole file read into memory, or a region carved out of one) and offers the typed
//! reads those formats need:
//!
//! | Operation                       | Result                                              |
//! |---------------------------------|-----------------------------------------------------|
//! | `read_u8/u16/u32`               | unsigned little-endian integers                     |
//! | `read_i8/i16/i32`               | signed little-endian integers                       |
//! | `read_f32`                      | little-endian IEEE-754 float                        |
//! | `read_fixed_string(n)`          | `n` bytes, value ends at the first null byte        |
//! | `read_length_prefixed_string()` | one length byte followed by that many bytes         |
//! | `seek(offset)`                  | absolute move, fails with `InvalidOffset` past end  |
//! | `advance(n)`                    | relative forward move                               |
//! | `position()`                    | current absolute offset                             |
//!
//! A read that runs past the end of the buffer fails with [`Error::TruncatedRead`]; it never
//! yields a partial value.
//!
//! The cursor also implements [`std::io::Read`] and [`std::io::Seek`] so that `binrw` derived
//! structures can be read straight from it.

pub mod cursor;
pub mod error;

pub use cursor::ByteCursor;
pub use error::{Error, Result};
