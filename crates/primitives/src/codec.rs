//! Fixed-width codecs for the primitive types crossing the opcode boundary.
//!
//! Fixed-size types encode big-endian at exactly their declared width;
//! signed integers use two's complement over the full width. Decoding
//! rejects any buffer whose length differs from the declared width.

use alloc::string::String;
use alloy_primitives::{Address, Bytes, FixedBytes, I256, U256};
use core::fmt;

/// Error returned by [`Codec::decode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// Buffer length does not match the declared width of the type.
    InvalidLength {
        /// Width the type declares.
        expected: usize,
        /// Length of the buffer that was supplied.
        got: usize,
    },
    /// Byte string is not valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { expected, got } => {
                write!(f, "invalid encoding length: expected {expected}, got {got}")
            }
            Self::InvalidUtf8 => f.write_str("byte string is not valid utf-8"),
        }
    }
}

impl core::error::Error for CodecError {}

/// Symmetric encoding between a primitive value and its byte string.
///
/// Encoding always produces exactly [`Codec::WIDTH`] bytes for fixed-width
/// types; variable-length types (`Bytes`, `String`) report `None` and
/// encode as themselves.
pub trait Codec: Sized {
    /// Declared width in bytes, or `None` for variable-length types.
    const WIDTH: Option<usize>;

    /// Encodes the value at its declared width.
    fn encode(&self) -> Bytes;

    /// Decodes a value from a buffer of exactly the declared width.
    fn decode(buf: &[u8]) -> Result<Self, CodecError>;
}

#[inline]
fn expect_len(buf: &[u8], expected: usize) -> Result<(), CodecError> {
    if buf.len() != expected {
        return Err(CodecError::InvalidLength {
            expected,
            got: buf.len(),
        });
    }
    Ok(())
}

impl Codec for Address {
    const WIDTH: Option<usize> = Some(20);

    fn encode(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_slice())
    }

    fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        expect_len(buf, 20)?;
        Ok(Self::from_slice(buf))
    }
}

impl Codec for bool {
    const WIDTH: Option<usize> = Some(1);

    fn encode(&self) -> Bytes {
        Bytes::copy_from_slice(&[*self as u8])
    }

    fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        expect_len(buf, 1)?;
        // Truth lives in the least significant bit.
        Ok(buf[0] & 1 == 1)
    }
}

impl<const N: usize> Codec for FixedBytes<N> {
    const WIDTH: Option<usize> = Some(N);

    fn encode(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_slice())
    }

    fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        expect_len(buf, N)?;
        Ok(Self::from_slice(buf))
    }
}

macro_rules! impl_codec_uint {
    ($($ty:ty),*) => {$(
        impl Codec for $ty {
            const WIDTH: Option<usize> = Some(core::mem::size_of::<$ty>());

            fn encode(&self) -> Bytes {
                Bytes::copy_from_slice(&self.to_be_bytes())
            }

            fn decode(buf: &[u8]) -> Result<Self, CodecError> {
                expect_len(buf, core::mem::size_of::<$ty>())?;
                let mut bytes = [0u8; core::mem::size_of::<$ty>()];
                bytes.copy_from_slice(buf);
                Ok(<$ty>::from_be_bytes(bytes))
            }
        }
    )*};
}

impl_codec_uint!(u8, u16, u32, u64, i8, i16, i32, i64);

impl Codec for U256 {
    const WIDTH: Option<usize> = Some(32);

    fn encode(&self) -> Bytes {
        Bytes::copy_from_slice(&self.to_be_bytes::<32>())
    }

    fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        expect_len(buf, 32)?;
        Ok(Self::from_be_slice(buf))
    }
}

impl Codec for I256 {
    const WIDTH: Option<usize> = Some(32);

    fn encode(&self) -> Bytes {
        Bytes::copy_from_slice(&self.to_be_bytes::<32>())
    }

    fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        expect_len(buf, 32)?;
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(buf);
        Ok(Self::from_raw(U256::from_be_bytes(bytes)))
    }
}

impl Codec for Bytes {
    const WIDTH: Option<usize> = None;

    fn encode(&self) -> Bytes {
        self.clone()
    }

    fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        Ok(Self::copy_from_slice(buf))
    }
}

impl Codec for String {
    const WIDTH: Option<usize> = None;

    fn encode(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }

    fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        core::str::from_utf8(buf)
            .map(Into::into)
            .map_err(|_| CodecError::InvalidUtf8)
    }
}
