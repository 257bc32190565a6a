pub type NodeId = String;
pub type TypeName = String;
