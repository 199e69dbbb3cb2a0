mod auth;
mod edit;
mod invalid_json;
mod shorten;
