mod console;
mod helpers;
mod registration;
