//! Exit status codes.
//! reference: [SYSEXITS](https://man.freebsd.org/cgi/man.cgi?query=sysexits&apropos=0&sektion=0&manpath=FreeBSD+11.2-stable&arch=default&format=html)

/// value: 1 <br>
/// A recognised failure: a missing or invalid manifest, an unknown or incomplete
/// collection, or an archive that cannot be written.
pub const EX_FAILURE: i32 = 1;

/// value: 70 <br>
/// An internal software error has been detected. This should be limited to non-operating system related errors as possible.
pub const EX_SOFTWARE: i32 = 70;
