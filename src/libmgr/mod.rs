//! Hybrid library dispatcher.
//!
//! The dispatcher turns an "open library" request into a backend choice, a
//! version check, and a base address, and aggregates lifecycle operations
//! (close, expunge, shutdown) across the virtual and native backends. It
//! keeps no handle storage of its own: ownership of every address is decided
//! by asking the backends, so recursive opens (a library's init code opening
//! further libraries) need no lock discipline.

pub mod backend;

pub use backend::{BackendKind, LibHandle, MemoryImage, NativeBackend, VirtualBackend};

use tracing::{error, info, warn};

use crate::config::{LibMode, LibsConfig};

/// Derives the base library name from a full open request name.
///
/// Strips any device (`:`) and directory (`/`) prefix, so
/// `"sys:libs/icon.library"` becomes `"icon.library"`. Native loading keeps
/// using the full name since it is path sensitive.
pub fn lib_base_name(full_name: &str) -> &str {
    let tail = match full_name.rfind('/') {
        Some(idx) => &full_name[idx + 1..],
        None => full_name,
    };
    match tail.rfind(':') {
        Some(idx) => &tail[idx + 1..],
        None => tail,
    }
}

/// Backend selection derived from a dispatch mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DispatchPlan {
    try_vlib: bool,
    try_alib: bool,
    fake: bool,
}

/// Maps a dispatch mode to its fixed backend-selection triple.
///
/// The virtual backend is always attempted before the native one when both
/// are enabled.
fn map_mode(mode: LibMode) -> DispatchPlan {
    match mode {
        LibMode::Auto => DispatchPlan {
            try_vlib: true,
            try_alib: true,
            fake: false,
        },
        LibMode::Vamos => DispatchPlan {
            try_vlib: true,
            try_alib: false,
            fake: false,
        },
        LibMode::Amiga => DispatchPlan {
            try_vlib: false,
            try_alib: true,
            fake: false,
        },
        LibMode::Fake => DispatchPlan {
            try_vlib: true,
            try_alib: false,
            fake: true,
        },
        // open_lib returns before mapping; no backend is touched
        LibMode::Off => DispatchPlan {
            try_vlib: false,
            try_alib: false,
            fake: false,
        },
    }
}

/// Routes library open/close/expunge requests between both backends.
pub struct LibDispatcher<V, N, M> {
    /// Virtual (host-implemented) backend.
    pub vlibs: V,

    /// Native (machine code) backend.
    pub alibs: N,

    /// Emulated memory image, used for the open-version gate.
    pub mem: M,

    cfg: LibsConfig,
}

impl<V: VirtualBackend, N: NativeBackend, M: MemoryImage> LibDispatcher<V, N, M> {
    /// Creates a dispatcher over the given backends and configuration.
    pub fn new(vlibs: V, alibs: N, mem: M, cfg: LibsConfig) -> Self {
        Self {
            vlibs,
            alibs,
            mem,
            cfg,
        }
    }

    /// Returns the persistent per-library configuration.
    pub fn config(&self) -> &LibsConfig {
        &self.cfg
    }

    /// Returns the persistent per-library configuration for modification.
    pub fn config_mut(&mut self) -> &mut LibsConfig {
        &mut self.cfg
    }

    /// Opens a library.
    ///
    /// Resolves the dispatch mode and version from the persistent
    /// configuration (overridable via `force_mode`/`force_version`), asks the
    /// enabled backends in fixed order (virtual before native), and applies
    /// the open-version gate. Returns the library base address, or `0` on
    /// failure — the same null-base contract a real system presents to the
    /// guest.
    pub fn open_lib(
        &mut self,
        full_name: &str,
        open_ver: u32,
        lock: Option<u32>,
        run_sp: Option<u32>,
        force_mode: Option<LibMode>,
        force_version: Option<u32>,
    ) -> u32 {
        let base_name = lib_base_name(full_name);
        info!(
            "open_lib: '{}' ver={} -> base_name='{}'",
            full_name, open_ver, base_name
        );
        let (mode, version) = self.lib_params(full_name, base_name, force_mode, force_version);
        info!("params: mode={}, version={}", mode, version);
        if mode == LibMode::Off {
            return 0;
        }
        let plan = map_mode(mode);

        let mut addr = 0;
        let mut vlib = None;
        if plan.try_vlib {
            vlib = self.vlibs.open_by_name(base_name, version, plan.fake);
            if let Some(ref handle) = vlib {
                addr = handle.base_addr;
                info!("got vlib: @{:06x}", addr);
            }
        }
        if plan.try_alib && addr == 0 {
            addr = self.alibs.open(full_name, lock, run_sp);
            if addr > 0 {
                info!("got alib: @{:06x}", addr);
            }
        }

        // got a lib? check version
        if addr > 0 {
            let save_addr = addr;
            if open_ver > 0 {
                addr = self.check_version(full_name, addr, open_ver);
            }
            // lib is too old: close again
            if addr == 0 {
                if let Some(ref handle) = vlib {
                    self.vlibs.close(handle);
                } else {
                    self.alibs.close(save_addr, run_sp);
                }
            }
        }
        addr
    }

    /// Closes the library at `addr`.
    ///
    /// Returns `true` if the library was expunged as well. An address
    /// neither backend owns is a guest bug: it is logged and reported as
    /// `false`, never a panic.
    pub fn close_lib(&mut self, addr: u32, run_sp: Option<u32>) -> bool {
        info!("close_lib: @{:06x}", addr);
        if let Some(handle) = self.vlibs.lookup_by_addr(addr) {
            self.vlibs.close(&handle)
        } else if self.alibs.is_base_addr(addr) {
            self.alibs.close(addr, run_sp)
        } else {
            error!("close: unknown lib @{:06x}!", addr);
            false
        }
    }

    /// Expunges the library at `addr`.
    ///
    /// Unlike close, the native probe uses the load address: a loaded but
    /// never opened library can be expunged directly. Returns `true` if the
    /// library was expunged.
    pub fn expunge_lib(&mut self, addr: u32, run_sp: Option<u32>) -> bool {
        info!("expunge_lib: @{:06x}", addr);
        if let Some(handle) = self.vlibs.lookup_by_addr(addr) {
            self.vlibs.expunge(&handle)
        } else if self.alibs.is_load_addr(addr) {
            self.alibs.expunge(addr, run_sp)
        } else {
            error!("expunge: unknown lib @{:06x}!", addr);
            false
        }
    }

    /// Expunges all unused libraries on both backends.
    ///
    /// Returns the number of libraries that could not be expunged because
    /// they are still referenced.
    pub fn expunge_libs(&mut self, run_sp: Option<u32>) -> u32 {
        info!("+expunge_libs");
        let aleft = self.alibs.expunge_all_libs(run_sp);
        let vleft = self.vlibs.expunge_all_libs();
        info!("-expunge_libs: aleft={}, vleft={}", aleft, vleft);
        vleft + aleft
    }

    /// Expunges all unused devices.
    ///
    /// Device expunging is only implemented on the virtual backend; the
    /// native side always contributes zero leftover.
    pub fn expunge_devs(&mut self) -> u32 {
        info!("+expunge_devs");
        let aleft = 0;
        let vleft = self.vlibs.expunge_all_devs();
        info!("-expunge_devs: aleft={}, vleft={}", aleft, vleft);
        vleft + aleft
    }

    /// Expunges everything at emulator teardown and reports leaks.
    ///
    /// Sweeps the native backend first, then the virtual one, and returns
    /// the total number of libraries still open. A nonzero result means the
    /// guest program left libraries open.
    pub fn shutdown(&mut self, run_sp: Option<u32>) -> u32 {
        info!("+shutdown");
        let aleft = self.alibs.expunge_all_libs(run_sp);
        if aleft > 0 {
            warn!("shutdown: can't expunge {} amiga libs/devs!", aleft);
        }
        let vleft = self.vlibs.expunge_all_libs();
        if vleft > 0 {
            warn!("shutdown: can't expunge {} vamos libs/devs!", vleft);
        }
        info!("-shutdown: aleft={}, vleft={}", aleft, vleft);
        vleft + aleft
    }

    fn lib_params(
        &self,
        full_name: &str,
        base_name: &str,
        force_mode: Option<LibMode>,
        force_version: Option<u32>,
    ) -> (LibMode, u32) {
        let lib_cfg = self.cfg.get_lib_config(full_name, base_name);
        let mode = force_mode.unwrap_or(lib_cfg.mode);
        let version = force_version.unwrap_or(lib_cfg.version);
        (mode, version)
    }

    fn check_version(&self, name: &str, addr: u32, open_ver: u32) -> u32 {
        let lib_ver = self.mem.read_version_field(addr);
        if lib_ver < open_ver {
            warn!(
                "lib '{}' has too low version: {} < {}",
                name, lib_ver, open_ver
            );
            0
        } else {
            info!(
                "lib '{}' version {} ok for open version {}",
                name, lib_ver, open_ver
            );
            addr
        }
    }
}
