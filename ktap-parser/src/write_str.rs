// Copyright (c) The ktap-tools Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! String-only writes for reporter output.
//!
//! Reports are written either to a terminal or, in tests, to an in-memory [`String`]. Both only
//! ever receive UTF-8, and the reporter needs `io::Error`s rather than `fmt::Error`s so that a
//! closed pipe can be told apart from a formatting bug.

use std::{
    fmt,
    io::{self, BufWriter, Write},
};

/// Abstracts over writing strings to a destination.
pub trait WriteStr {
    /// Writes a string.
    fn write_str(&mut self, s: &str) -> io::Result<()>;

    /// Flushes buffered output so that it reaches its destination.
    fn write_str_flush(&mut self) -> io::Result<()>;

    /// Writes formatted output, for use with `write!` and `writeln!`.
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        struct Adapter<'a, T: ?Sized> {
            inner: &'a mut T,
            error: io::Result<()>,
        }

        impl<T: ?Sized + WriteStr> fmt::Write for Adapter<'_, T> {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                self.inner.write_str(s).map_err(|error| {
                    self.error = Err(error);
                    fmt::Error
                })
            }
        }

        let mut adapter = Adapter {
            inner: self,
            error: Ok(()),
        };
        match fmt::write(&mut adapter, args) {
            Ok(()) => Ok(()),
            // An error from the writer takes precedence over a generic formatter failure.
            Err(_) => adapter
                .error
                .and_then(|()| Err(io::Error::other("formatter error"))),
        }
    }
}

impl WriteStr for String {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.push_str(s);
        Ok(())
    }

    fn write_str_flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write> WriteStr for BufWriter<W> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.write_all(s.as_bytes())
    }

    fn write_str_flush(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl<T: WriteStr + ?Sized> WriteStr for &mut T {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        (**self).write_str(s)
    }

    fn write_str_flush(&mut self) -> io::Result<()> {
        (**self).write_str_flush()
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        (**self).write_fmt(args)
    }
}
