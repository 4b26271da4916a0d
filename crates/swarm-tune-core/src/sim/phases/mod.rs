mod events;
mod geometry;
mod motion;
mod record;
