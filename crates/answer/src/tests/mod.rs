mod harness;
mod turn_events;
