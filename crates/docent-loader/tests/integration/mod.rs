mod help_context;
mod manifest_loading;
mod offline;
