use crate::board::Player;
use crate::bot::Bot;
use crate::game::Move;
use crate::snapshot::Snapshot;
use libloading::{Library, Symbol};
use std::ffi::CStr;
use std::os::raw::c_char;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// FFI-safe representation of a bot plugin
/// This is the interface used to load bots from dynamic libraries
#[repr(C)]
pub struct BotPlugin {
    pub bot_ptr: *mut (),
    pub vtable: BotVTable,
}

/// Virtual table for bot operations
/// All bot implementations must provide these function pointers
#[repr(C)]
pub struct BotVTable {
    /// Borrowed, valid until `drop` is called.
    pub name: unsafe extern "C" fn(*mut ()) -> *const c_char,
    /// Writes the chosen move to the out pointer and returns true, or
    /// returns false to resign.
    pub get_move: unsafe extern "C" fn(*mut (), *const Snapshot, u64, *mut Move) -> bool,
    pub game_start: unsafe extern "C" fn(*mut (), Player),
    pub notify_move: unsafe extern "C" fn(*mut (), Move),
    pub game_end: unsafe extern "C" fn(*mut ()),
    pub drop: unsafe extern "C" fn(*mut ()),
}

/// Type signature for the plugin creation function
/// Every plugin library must export a function with this signature
pub type CreateBotFn = unsafe extern "C" fn() -> *mut BotPlugin;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Failed to load library: {0}")]
    Load(#[source] libloading::Error),
    #[error("Failed to find create_bot function: {0}")]
    MissingSymbol(#[source] libloading::Error),
    #[error("create_bot returned null")]
    NullPlugin,
}

/// Wrapper that loads a bot from a dynamic library
pub struct PluginBot {
    plugin: Box<BotPlugin>,
    name: String,
    _library: Library, // Keep library alive
}

impl PluginBot {
    /// Load a bot plugin from a dynamic library file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PluginError> {
        unsafe {
            let library = Library::new(path.as_ref()).map_err(PluginError::Load)?;

            let create_bot: Symbol<CreateBotFn> = library
                .get(b"create_bot")
                .map_err(PluginError::MissingSymbol)?;

            let plugin_ptr = create_bot();
            if plugin_ptr.is_null() {
                return Err(PluginError::NullPlugin);
            }

            let plugin = Box::from_raw(plugin_ptr);
            let name = plugin_name(&plugin);

            Ok(PluginBot {
                plugin,
                name,
                _library: library,
            })
        }
    }
}

/// Copies the plugin's name so it never has to be asked again.
///
/// # Safety
/// `plugin` must come from a live `create_bot` call.
unsafe fn plugin_name(plugin: &BotPlugin) -> String {
    unsafe {
        let name_ptr = (plugin.vtable.name)(plugin.bot_ptr);
        if name_ptr.is_null() {
            return "Unknown".to_string();
        }
        CStr::from_ptr(name_ptr).to_string_lossy().into_owned()
    }
}

impl Bot for PluginBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_move(&mut self, snapshot: &Snapshot, time_limit: Duration) -> Option<Move> {
        let mut out = std::mem::MaybeUninit::<Move>::uninit();
        unsafe {
            let played = (self.plugin.vtable.get_move)(
                self.plugin.bot_ptr,
                snapshot as *const Snapshot,
                time_limit.as_millis() as u64,
                out.as_mut_ptr(),
            );
            played.then(|| out.assume_init())
        }
    }

    fn game_start(&mut self, player: Player) {
        unsafe {
            (self.plugin.vtable.game_start)(self.plugin.bot_ptr, player);
        }
    }

    fn notify_move(&mut self, mv: Move) {
        unsafe {
            (self.plugin.vtable.notify_move)(self.plugin.bot_ptr, mv);
        }
    }

    fn game_end(&mut self) {
        unsafe {
            (self.plugin.vtable.game_end)(self.plugin.bot_ptr);
        }
    }
}

impl Drop for PluginBot {
    fn drop(&mut self) {
        unsafe {
            (self.plugin.vtable.drop)(self.plugin.bot_ptr);
        }
    }
}

unsafe impl Send for PluginBot {}

/// Helper macro for implementing a bot plugin
/// This handles all the FFI boilerplate. The bot type must implement
/// `Bot` and `Default`.
#[macro_export]
macro_rules! export_bot {
    ($bot_type:ty) => {
        struct ExportedBot {
            bot: $bot_type,
            name: std::ffi::CString,
        }

        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn create_bot() -> *mut $crate::plugin::BotPlugin {
            let bot = <$bot_type>::default();
            let Ok(name) = std::ffi::CString::new($crate::bot::Bot::name(&bot)) else {
                return std::ptr::null_mut();
            };
            let bot_ptr = Box::into_raw(Box::new(ExportedBot { bot, name })) as *mut ();

            let vtable = $crate::plugin::BotVTable {
                name: bot_name,
                get_move: bot_get_move,
                game_start: bot_game_start,
                notify_move: bot_notify_move,
                game_end: bot_game_end,
                drop: bot_drop,
            };

            Box::into_raw(Box::new($crate::plugin::BotPlugin { bot_ptr, vtable }))
        }

        unsafe extern "C" fn bot_name(ptr: *mut ()) -> *const std::os::raw::c_char {
            let shell = unsafe { &*(ptr as *const ExportedBot) };
            shell.name.as_ptr()
        }

        unsafe extern "C" fn bot_get_move(
            ptr: *mut (),
            snapshot: *const $crate::snapshot::Snapshot,
            time_limit_ms: u64,
            out: *mut $crate::game::Move,
        ) -> bool {
            let shell = unsafe { &mut *(ptr as *mut ExportedBot) };
            let snapshot = unsafe { &*snapshot };
            let time_limit = std::time::Duration::from_millis(time_limit_ms);

            match $crate::bot::Bot::get_move(&mut shell.bot, snapshot, time_limit) {
                Some(mv) => {
                    unsafe { out.write(mv) };
                    true
                }
                None => false,
            }
        }

        unsafe extern "C" fn bot_game_start(ptr: *mut (), player: $crate::board::Player) {
            let shell = unsafe { &mut *(ptr as *mut ExportedBot) };
            $crate::bot::Bot::game_start(&mut shell.bot, player);
        }

        unsafe extern "C" fn bot_notify_move(ptr: *mut (), mv: $crate::game::Move) {
            let shell = unsafe { &mut *(ptr as *mut ExportedBot) };
            $crate::bot::Bot::notify_move(&mut shell.bot, mv);
        }

        unsafe extern "C" fn bot_game_end(ptr: *mut ()) {
            let shell = unsafe { &mut *(ptr as *mut ExportedBot) };
            $crate::bot::Bot::game_end(&mut shell.bot);
        }

        unsafe extern "C" fn bot_drop(ptr: *mut ()) {
            let _ = unsafe { Box::from_raw(ptr as *mut ExportedBot) };
        }
    };
}
