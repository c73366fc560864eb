pub mod consulta;
pub mod enums;
pub mod exame;
pub mod push_token;
pub mod resultado;
pub mod usuario;

pub use consulta::*;
pub use exame::*;
pub use push_token::*;
pub use resultado::*;
pub use usuario::*;
