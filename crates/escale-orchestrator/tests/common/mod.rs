//! Recording fakes shared by the orchestrator tests.
//!
//! All fakes append to one call log so tests can assert the global order
//! of remote calls across collaborators.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use escale_core::{
    BoxFuture, ClusterClient, ComputeClient, Node, NodeRole, ScalingGroup, ScalingGroupClient,
    Shard,
};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn data_node(name: &str, ip: &str) -> Node {
    Node {
        name: name.to_string(),
        ip: ip.to_string(),
        role: NodeRole::Data,
        role_letters: "di".to_string(),
        master: false,
    }
}

pub fn master_node(name: &str, ip: &str) -> Node {
    Node {
        name: name.to_string(),
        ip: ip.to_string(),
        role: NodeRole::CoordinatorOnly,
        role_letters: "m".to_string(),
        master: true,
    }
}

pub fn shard_on(index: &str, node: &str) -> Shard {
    Shard {
        index: index.to_string(),
        shard: "0".to_string(),
        prirep: "p".to_string(),
        state: "STARTED".to_string(),
        node: Some(node.to_string()),
    }
}

/// Pops scripted responses in order; the last one repeats forever.
struct Script<T: Clone> {
    responses: VecDeque<T>,
}

impl<T: Clone> Script<T> {
    fn new(responses: Vec<T>) -> Self {
        Self {
            responses: responses.into(),
        }
    }

    fn next(&mut self) -> T {
        if self.responses.len() > 1 {
            self.responses.pop_front().unwrap()
        } else {
            self.responses.front().cloned().unwrap()
        }
    }
}

pub struct FakeCluster {
    log: CallLog,
    nodes: Mutex<Script<Vec<Node>>>,
    shards: Mutex<Script<Vec<Shard>>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl FakeCluster {
    pub fn new(log: &CallLog, nodes: Vec<Node>) -> Self {
        Self {
            log: log.clone(),
            nodes: Mutex::new(Script::new(vec![nodes])),
            shards: Mutex::new(Script::new(vec![Vec::new()])),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Successive `list_nodes` responses.
    pub fn with_node_script(self, script: Vec<Vec<Node>>) -> Self {
        *self.nodes.lock().unwrap() = Script::new(script);
        self
    }

    /// Successive `shards_on` responses.
    pub fn with_shard_script(self, script: Vec<Vec<Shard>>) -> Self {
        *self.shards.lock().unwrap() = Script::new(script);
        self
    }

    pub fn failing(self, method: &'static str) -> Self {
        self.failing.lock().unwrap().insert(method);
        self
    }

    fn record(&self, method: &'static str, call: String) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(method) {
            return Err(anyhow!("{method} failed"));
        }
        Ok(())
    }
}

impl ClusterClient for FakeCluster {
    fn list_nodes(&self) -> BoxFuture<'_, Vec<Node>> {
        Box::pin(async move {
            self.record("list_nodes", "list_nodes".to_string())?;
            Ok(self.nodes.lock().unwrap().next())
        })
    }

    fn set_allocation(&self, enabled: bool) -> BoxFuture<'_, ()> {
        Box::pin(async move { self.record("set_allocation", format!("set_allocation({enabled})")) })
    }

    fn drain<'a>(&'a self, node_name: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move { self.record("drain", format!("drain({node_name})")) })
    }

    fn clear_exclusions(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move { self.record("clear_exclusions", "clear_exclusions".to_string()) })
    }

    fn shards_on<'a>(&'a self, node_names: &'a [String]) -> BoxFuture<'a, Vec<Shard>> {
        Box::pin(async move {
            self.record("shards_on", format!("shards_on({})", node_names.join(",")))?;
            Ok(self.shards.lock().unwrap().next())
        })
    }
}

pub struct FakeScaling {
    log: CallLog,
    group: ScalingGroup,
    failing: Mutex<HashSet<&'static str>>,
}

impl FakeScaling {
    pub fn new(log: &CallLog, name: &str, desired_capacity: u32) -> Self {
        Self {
            log: log.clone(),
            group: ScalingGroup {
                name: name.to_string(),
                desired_capacity,
                min_size: 0,
                max_size: 10,
            },
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn failing(self, method: &'static str) -> Self {
        self.failing.lock().unwrap().insert(method);
        self
    }

    fn record(&self, method: &'static str, call: String) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(method) {
            return Err(anyhow!("{method} failed"));
        }
        Ok(())
    }
}

impl ScalingGroupClient for FakeScaling {
    fn describe<'a>(&'a self, group: &'a str) -> BoxFuture<'a, ScalingGroup> {
        Box::pin(async move {
            self.record("describe", format!("describe({group})"))?;
            Ok(self.group.clone())
        })
    }

    fn set_desired_capacity<'a>(&'a self, group: &'a str, capacity: u32) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.record(
                "set_desired_capacity",
                format!("set_desired_capacity({group}, {capacity})"),
            )
        })
    }

    fn detach_instance<'a>(
        &'a self,
        group: &'a str,
        instance_id: &'a str,
        decrement_desired: bool,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.record(
                "detach_instance",
                format!("detach_instance({group}, {instance_id}, {decrement_desired})"),
            )
        })
    }
}

pub struct FakeCompute {
    log: CallLog,
    instances: HashMap<String, String>,
    failing: Mutex<HashSet<&'static str>>,
}

impl FakeCompute {
    /// `instances` maps private ip to instance id.
    pub fn new(log: &CallLog, instances: &[(&str, &str)]) -> Self {
        Self {
            log: log.clone(),
            instances: instances
                .iter()
                .map(|(ip, id)| (ip.to_string(), id.to_string()))
                .collect(),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn failing(self, method: &'static str) -> Self {
        self.failing.lock().unwrap().insert(method);
        self
    }

    fn record(&self, method: &'static str, call: String) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(method) {
            return Err(anyhow!("{method} failed"));
        }
        Ok(())
    }
}

impl ComputeClient for FakeCompute {
    fn resolve_instance_id_by_private_ip<'a>(&'a self, ip: &'a str) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move {
            self.record("resolve", format!("resolve_instance_id_by_private_ip({ip})"))?;
            Ok(self.instances.get(ip).cloned())
        })
    }

    fn terminate_instance<'a>(&'a self, instance_id: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move { self.record("terminate", format!("terminate_instance({instance_id})")) })
    }
}
