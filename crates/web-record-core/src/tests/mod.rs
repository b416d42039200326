mod controls;
mod coordinator;
