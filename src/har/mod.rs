pub mod model;
pub mod parser;
pub mod repair;

pub use model::{
    Content, Cookie, Creator, Entry, Har, Header, Log, PostData, QueryParam, Request, Response,
    Timings,
};
pub use parser::{load_har_file, parse_har_bytes, Parsed};
pub use repair::repair;
