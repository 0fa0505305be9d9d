// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

pub mod classify;
pub mod parser;
pub mod perf;
pub mod phase;
pub mod types;

pub use classify::{ClassificationPolicy, DefaultPolicy};
pub use phase::PhaseGroups;
pub use types::{EntityClass, EntityList, EntityNode, NodeId};
