#![allow(non_snake_case)]

use super::*;
use test_case::test_case;
use tracing_subscriber::prelude::*;

fn attach(handle: &ReloadHandle, level: LogLevel) -> impl tracing::Subscriber {
    let (layer, filter_handle) = reload::Layer::new(level_filter(level));
    let subscriber = tracing_subscriber::registry().with(layer);
    let installed = handle.install_once(|| Ok((filter_handle, level))).unwrap();
    assert!(installed);
    subscriber
}

#[test]
fn ReloadHandle___new___is_not_initialized() {
    let handle = ReloadHandle::new();

    assert!(!handle.is_initialized());
    assert_eq!(handle.current_level(), None);
}

#[test]
fn ReloadHandle___reload_level___fails_before_initialization() {
    let handle = ReloadHandle::new();

    let result = handle.reload_level(LogLevel::Debug);

    assert_eq!(result, Err(LoggingError::NotInitialized));
}

#[test]
fn ReloadHandle___install_once___records_level() {
    let handle = ReloadHandle::new();

    let _subscriber = attach(&handle, LogLevel::Warn);

    assert!(handle.is_initialized());
    assert_eq!(handle.current_level(), Some(LogLevel::Warn));
}

#[test]
fn ReloadHandle___install_once___second_call_is_skipped() {
    let handle = ReloadHandle::new();
    let _subscriber = attach(&handle, LogLevel::Info);

    let mut ran = false;
    let installed = handle
        .install_once(|| {
            ran = true;
            Err(LoggingError::NotInitialized)
        })
        .unwrap();

    assert!(!installed);
    assert!(!ran);
}

#[test]
fn ReloadHandle___install_once___failure_leaves_handle_uninitialized() {
    let handle = ReloadHandle::new();

    let result = handle.install_once(|| Err(LoggingError::SubscriberInstalled("taken".into())));

    assert!(result.is_err());
    assert!(!handle.is_initialized());
}

#[test]
fn ReloadHandle___reload_level___updates_current_level() {
    let handle = ReloadHandle::new();
    let _subscriber = attach(&handle, LogLevel::Info);

    handle.reload_level(LogLevel::Trace).unwrap();

    assert_eq!(handle.current_level(), Some(LogLevel::Trace));
}

#[test]
fn ReloadHandle___reload_level___fails_once_subscriber_is_dropped() {
    let handle = ReloadHandle::new();
    let subscriber = attach(&handle, LogLevel::Info);
    drop(subscriber);

    let result = handle.reload_level(LogLevel::Debug);

    assert!(matches!(result, Err(LoggingError::Reload(_))));
    assert_eq!(handle.current_level(), Some(LogLevel::Info));
}

#[test]
fn ReloadHandle___global___returns_same_instance() {
    let a = ReloadHandle::global() as *const ReloadHandle;
    let b = ReloadHandle::global() as *const ReloadHandle;

    assert_eq!(a, b);
}

#[test_case(LogLevel::Trace, LevelFilter::TRACE)]
#[test_case(LogLevel::Debug, LevelFilter::DEBUG)]
#[test_case(LogLevel::Info, LevelFilter::INFO)]
#[test_case(LogLevel::Warn, LevelFilter::WARN)]
#[test_case(LogLevel::Error, LevelFilter::ERROR)]
#[test_case(LogLevel::Off, LevelFilter::OFF)]
fn level_filter___maps_every_level(level: LogLevel, expected: LevelFilter) {
    assert_eq!(level_filter(level), expected);
}
