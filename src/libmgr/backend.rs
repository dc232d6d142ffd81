//! Backend contracts for library implementations.
//!
//! This module defines the interfaces the dispatcher requires of the two
//! library backends. Each backend is authoritative over the addresses of the
//! handles it created; the dispatcher holds no registry of its own and only
//! routes by address.

/// Which backend created and owns a library handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Host-reimplemented library, invoked via trap interception.
    Virtual,

    /// Loaded and relocated native machine code.
    Native,
}

/// One open library or device instance.
///
/// Created by a backend's open operation and destroyed by that backend's
/// close/expunge. The base address is nonzero while open and unique among
/// simultaneously open handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibHandle {
    /// Base address of the library node in guest memory.
    pub base_addr: u32,

    /// Owning backend.
    pub backend: BackendKind,

    /// Library name.
    pub name: String,

    /// Version the library reports.
    pub version: u32,
}

/// Host-reimplemented ("vamos") library backend.
pub trait VirtualBackend {
    /// Opens a library by base name. `fake` requests a stub presence
    /// without a behavioral implementation.
    fn open_by_name(&mut self, base_name: &str, version: u32, fake: bool) -> Option<LibHandle>;

    /// Closes a handle. Returns `true` if the reference count reached zero
    /// and the library was fully expunged.
    fn close(&mut self, handle: &LibHandle) -> bool;

    /// Expunges a handle with no outstanding opens. Returns `true` on
    /// success.
    fn expunge(&mut self, handle: &LibHandle) -> bool;

    /// Returns the handle owning `addr`, if this backend created it.
    fn lookup_by_addr(&self, addr: u32) -> Option<LibHandle>;

    /// Expunges all libraries without outstanding opens; returns the number
    /// that could not be expunged.
    fn expunge_all_libs(&mut self) -> u32;

    /// Expunges all devices without outstanding opens; returns the number
    /// that could not be expunged.
    fn expunge_all_devs(&mut self) -> u32;
}

/// Native machine-code library backend.
///
/// Native loading is path and version sensitive, so open requests carry the
/// full request name, not the normalized base name. `run_sp` is the guest
/// stack pointer used when backend code has to run guest init/expunge
/// routines.
pub trait NativeBackend {
    /// Opens a library by full name. Returns the base address, or `0` on
    /// failure.
    fn open(&mut self, full_name: &str, lock: Option<u32>, run_sp: Option<u32>) -> u32;

    /// Closes the library at `addr`. Returns `true` if its segment list was
    /// freed.
    fn close(&mut self, addr: u32, run_sp: Option<u32>) -> bool;

    /// Expunges the library at `addr`. Returns `true` if its segment list
    /// was freed.
    fn expunge(&mut self, addr: u32, run_sp: Option<u32>) -> bool;

    /// Returns whether `addr` is the base address of an open native library.
    fn is_base_addr(&self, addr: u32) -> bool;

    /// Returns whether `addr` is the load address of a loaded (not
    /// necessarily opened) native library.
    fn is_load_addr(&self, addr: u32) -> bool;

    /// Expunges all libraries without outstanding opens; returns the number
    /// that could not be expunged.
    fn expunge_all_libs(&mut self, run_sp: Option<u32>) -> u32;
}

/// Read access to the emulated memory image.
pub trait MemoryImage {
    /// Reads the version field from the library node at `base_addr`.
    fn read_version_field(&self, base_addr: u32) -> u32;
}
