mod config_test;
mod dispatch_test;
mod targets_test;
