pub mod adapter;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod credentials;
pub mod images;
pub mod login;
pub mod models;
pub mod terminal;
pub mod view;
