mod adc;
mod config;
mod drain;
mod pm;
mod session;
mod stream;
