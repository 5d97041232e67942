//! Shared helpers for namespace integration tests
#![allow(dead_code)]

use ::common::cdmi::{ContainerRequest, DataObjectRequest};
use ::common::namespace::{Namespace, NamespaceConfig, PutOutcome, PutRequest, Target};

/// Fresh namespace with the default configuration
pub fn setup_namespace() -> Namespace {
    Namespace::new(NamespaceConfig::default()).unwrap()
}

pub fn target(raw: &str) -> Target {
    Target::parse(raw).unwrap()
}

pub fn container(metadata: &[(&str, &str)]) -> PutRequest {
    ContainerRequest {
        metadata: Some(to_metadata(metadata)),
        move_from: None,
    }
    .into_put()
    .unwrap()
}

pub fn move_container(from: &str, metadata: &[(&str, &str)]) -> PutRequest {
    ContainerRequest {
        metadata: Some(to_metadata(metadata)),
        move_from: Some(from.to_string()),
    }
    .into_put()
    .unwrap()
}

pub fn object(value: &str) -> PutRequest {
    DataObjectRequest {
        mimetype: Some("text/plain".to_string()),
        value: Some(value.to_string()),
        ..Default::default()
    }
    .into_put()
    .unwrap()
}

pub fn move_object(from: &str) -> PutRequest {
    DataObjectRequest {
        move_from: Some(from.to_string()),
        ..Default::default()
    }
    .into_put()
    .unwrap()
}

/// Create each container in order; parents must come first
pub fn mkdirs(ns: &Namespace, paths: &[&str]) -> Vec<PutOutcome> {
    paths
        .iter()
        .map(|path| ns.put(&target(path), container(&[])).unwrap())
        .collect()
}

fn to_metadata(pairs: &[(&str, &str)]) -> ::common::namespace::Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
