//! Text output split between the serial console and the display.

use core::fmt::{self, Write};

/// Writes every string to two sinks, `A` first.
///
/// `B` is written even when `A` fails; the write fails if either sink did.
pub struct Both<A, B> {
    a: A,
    b: B,
}

impl<A: Write, B: Write> Both<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }

    pub fn into_inner(self) -> (A, B) {
        (self.a, self.b)
    }
}

impl<A: Write, B: Write> Write for Both<A, B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let first = self.a.write_str(s);
        let second = self.b.write_str(s);
        first.and(second)
    }
}
