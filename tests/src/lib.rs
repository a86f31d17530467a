#![cfg(test)]
mod resolve;
