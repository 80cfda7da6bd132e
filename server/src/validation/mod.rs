pub mod slug;
pub mod url;
