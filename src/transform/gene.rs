use crate::entities::gene::GeneAssociation;
use crate::sources::opentargets::OpenTargetsTargetRow;
use crate::utils::numeric::round_to;

pub fn from_opentargets_target(row: OpenTargetsTargetRow) -> GeneAssociation {
    GeneAssociation {
        symbol: row.symbol,
        name: row.name,
        score: round_to(row.score, 3),
    }
}
