pub mod constants;
pub mod state;
pub mod input;
pub mod timer;
pub mod systems;
pub mod session;
pub mod game_loop;
