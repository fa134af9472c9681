//! Purpose: Applicative combination of 2..=9 independent decodings.
//! Exports: `Zip`, `ZipWith`, `zip`, `zip_with`.
//! Role: Builds tuple- or struct-shaped decodings from field decodings.
//! Invariants: Components run strictly left to right against the same handle.
//! Invariants: The first component failure is returned unchanged; later components do not run.

use crate::api::decoding::Decoding;

pub trait Zip {
    type Output;

    fn zip(self) -> Decoding<Self::Output>;
}

pub trait ZipWith<F, O> {
    fn zip_with(self, transform: F) -> Decoding<O>;
}

/// Combines a tuple of decodings into a decoding of the tuple of their values.
///
/// `zip((a, b, c))` behaves like `zip((zip((a, b)), c))` with the pair flattened.
pub fn zip<Z: Zip>(decodings: Z) -> Decoding<Z::Output> {
    decodings.zip()
}

/// `zip(decodings).map(transform)` with the tuple spread into `transform`'s arguments,
/// so a struct can be built straight from its constructor.
pub fn zip_with<Z, F, O>(decodings: Z, transform: F) -> Decoding<O>
where
    Z: ZipWith<F, O>,
{
    decodings.zip_with(transform)
}

macro_rules! zip_tuple {
    ($($value:ident: $ty:ident),+) => {
        impl<$($ty: 'static),+> Zip for ($(Decoding<$ty>,)+) {
            type Output = ($($ty,)+);

            fn zip(self) -> Decoding<Self::Output> {
                let ($($value,)+) = self;
                Decoding::new(move |decoder| Ok(($($value.decode(decoder)?,)+)))
            }
        }

        impl<$($ty: 'static,)+ F, O> ZipWith<F, O> for ($(Decoding<$ty>,)+)
        where
            F: Fn($($ty),+) -> O + Send + Sync + 'static,
            O: 'static,
        {
            fn zip_with(self, transform: F) -> Decoding<O> {
                self.zip().map(move |($($value,)+)| transform($($value),+))
            }
        }
    };
}

zip_tuple!(a: A, b: B);
zip_tuple!(a: A, b: B, c: C);
zip_tuple!(a: A, b: B, c: C, d: D);
zip_tuple!(a: A, b: B, c: C, d: D, e: E);
zip_tuple!(a: A, b: B, c: C, d: D, e: E, f: F6);
zip_tuple!(a: A, b: B, c: C, d: D, e: E, f: F6, g: G);
zip_tuple!(a: A, b: B, c: C, d: D, e: E, f: F6, g: G, h: H);
zip_tuple!(a: A, b: B, c: C, d: D, e: E, f: F6, g: G, h: H, i: I);

#[cfg(test)]
mod tests {
    use super::{zip, zip_with};
    use crate::api::decoding::{Decoding, decode};
    use crate::core::error::ErrorKind;

    #[test]
    fn zip_pairs_share_the_handle() {
        let pair = zip((
            Decoding::<u8>::with_key("a"),
            Decoding::<String>::with_key("b"),
        ));
        let value = decode(br#"{"a":1,"b":"x"}"#, &pair).expect("pair");
        assert_eq!(value, (1, "x".to_string()));
    }

    #[test]
    fn zip_nine_keeps_order() {
        let nine = zip((
            Decoding::<u8>::unkeyed(),
            Decoding::<u8>::unkeyed(),
            Decoding::<u8>::unkeyed(),
            Decoding::<u8>::unkeyed(),
            Decoding::<u8>::unkeyed(),
            Decoding::<u8>::unkeyed(),
            Decoding::<u8>::unkeyed(),
            Decoding::<u8>::unkeyed(),
            Decoding::<u8>::unkeyed(),
        ));
        let value = decode(b"[1,2,3,4,5,6,7,8,9]", &nine).expect("nine");
        assert_eq!(value, (1, 2, 3, 4, 5, 6, 7, 8, 9));
    }

    #[test]
    fn zip_with_spreads_arguments() {
        let sum = zip_with(
            (
                Decoding::<u32>::with_key("x"),
                Decoding::<u32>::with_key("y"),
                Decoding::<u32>::with_key("z"),
            ),
            |x: u32, y: u32, z: u32| x + y + z,
        );
        assert_eq!(decode(br#"{"x":1,"y":2,"z":3}"#, &sum).expect("sum"), 6);
    }

    #[test]
    fn zip_short_circuits_on_first_failure() {
        let triple = zip((
            Decoding::<u8>::with_key("a"),
            Decoding::<u8>::with_key("missing"),
            Decoding::<u8>::with_key("bad"),
        ));
        let err = decode(br#"{"a":1,"bad":"x"}"#, &triple).expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::KeyNotFound);
        assert_eq!(err.message(), Some("key `missing` not found"));
    }
}
