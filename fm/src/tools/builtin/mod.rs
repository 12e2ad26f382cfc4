//! Built-in file tools

mod create_directory;
mod edit_file;
mod list_files;
mod read_file;

pub use create_directory::CreateDirectoryTool;
pub use edit_file::EditFileTool;
pub use list_files::ListFilesTool;
pub use read_file::ReadFileTool;
