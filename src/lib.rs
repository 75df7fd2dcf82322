// Flight relay - database change feed to websocket broadcast, plus the map-side bookkeeping
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
