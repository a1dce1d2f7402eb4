// src/server/admission.rs

//! The admission gate: decides, once per accepted connection and strictly
//! before any command is read, whether to serve the connection locally or
//! redirect it to a sibling instance.
//!
//! The policy is a static, table-driven load distribution over a
//! monotonically increasing connection counter. It has no knowledge of
//! mirror liveness; a redirect can point at a dead mirror.

/// The accept-time decision for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    ServeLocally,
    Redirect(u16),
}

/// One accepted connection: its counter value and the verdict for it.
#[derive(Debug, Clone, Copy)]
pub struct Admission {
    /// Counter value at admission time; doubles as the session id for
    /// locally served connections. Workers only ever see this snapshot.
    pub counter: u64,
    pub verdict: Verdict,
}

/// Redirect target of one policy tier.
#[derive(Debug, Clone, Copy)]
enum Target {
    Local,
    MirrorA,
    MirrorB,
    /// Round-robin over {primary, mirror A, mirror B} by `(counter - 10) % 3`.
    Rotation,
}

/// The fixed three-tier policy table, matched top to bottom against the
/// counter. Upper bounds are inclusive.
const POLICY: &[(u64, u64, Target)] = &[
    (1, 3, Target::Local),
    (4, 6, Target::MirrorA),
    (7, 9, Target::MirrorB),
    (10, u64::MAX, Target::Rotation),
];

/// Owned solely by the accept loop; lock-free by construction. Never handed
/// to workers, never decremented, never persisted.
#[derive(Debug)]
pub struct AdmissionGate {
    connections_seen: u64,
    primary_port: u16,
    mirror_a_port: u16,
    mirror_b_port: u16,
}

impl AdmissionGate {
    pub fn new(primary_port: u16, mirror_a_port: u16, mirror_b_port: u16) -> Self {
        Self {
            connections_seen: 0,
            primary_port,
            mirror_a_port,
            mirror_b_port,
        }
    }

    /// Admits one connection: increments the counter exactly once and looks
    /// up the verdict in the policy table.
    pub fn admit(&mut self) -> Admission {
        self.connections_seen += 1;
        let counter = self.connections_seen;

        let (_, _, target) = POLICY
            .iter()
            .find(|(lo, hi, _)| (*lo..=*hi).contains(&counter))
            .expect("policy table covers all counter values");

        let verdict = match target {
            Target::Local => Verdict::ServeLocally,
            Target::MirrorA => Verdict::Redirect(self.mirror_a_port),
            Target::MirrorB => Verdict::Redirect(self.mirror_b_port),
            Target::Rotation => {
                let rotation = [self.primary_port, self.mirror_a_port, self.mirror_b_port];
                Verdict::Redirect(rotation[((counter - 10) % 3) as usize])
            }
        };
        Admission { counter, verdict }
    }

    /// Counter value of the most recently admitted connection.
    pub fn connections_seen(&self) -> u64 {
        self.connections_seen
    }
}
