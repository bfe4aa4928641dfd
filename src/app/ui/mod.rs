mod controls;
mod details;
mod editor;
mod panels;
