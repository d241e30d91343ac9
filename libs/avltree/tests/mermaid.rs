#![cfg(feature = "mermaid")]

mod common;

use std::ptr::NonNull;

use crate::common::{Data, SCENARIO, data_tree};

#[test]
fn empty_tree() {
    let tree = data_tree();
    assert_eq!(tree.mermaid().to_string(), "graph TB;\n");
}

#[test]
fn single_node() {
    let node = Data::new(42);
    let mut tree = data_tree();
    tree.insert(NonNull::from(&node)).unwrap();

    assert_eq!(
        tree.mermaid().to_string(),
        "graph TB;\n\
         \tROOT[ROOT]-->N42\n\
         \tN42((key: 42<br/>height: 1))\n\
         \t\tN42-->EL42((null))\n\
         \t\tN42-->ER42((null))\n"
    );
}

#[test]
fn scenario_diagram() {
    let nodes = SCENARIO.map(Data::new);
    let mut tree = data_tree();
    for node in &nodes {
        tree.insert(NonNull::from(node)).unwrap();
    }

    let diagram = tree.mermaid().to_string();
    let lines = diagram.lines().collect::<Vec<_>>();

    assert_eq!(lines[0], "graph TB;");
    assert_eq!(lines[1], "\tROOT[ROOT]-->N47");

    // one label and two edges per node
    assert_eq!(lines.len(), 2 + 3 * nodes.len());
    assert_eq!(diagram.matches("((null))").count(), nodes.len() + 1);

    // labels appear in key order
    let labels = lines
        .iter()
        .filter_map(|line| line.split("((key: ").nth(1))
        .map(|rest| rest.split("<br/>").next().unwrap().parse::<i32>().unwrap())
        .collect::<Vec<_>>();
    let mut sorted = SCENARIO.to_vec();
    sorted.sort_unstable();
    assert_eq!(labels, sorted);

    assert!(diagram.contains("\tN47((key: 47<br/>height: 5))\n\t\tN47-->N10\n\t\tN47-->N127\n"));
    assert!(diagram.contains("\tN127((key: 127<br/>height: 4))\n\t\tN127-->N108\n\t\tN127-->N2345\n"));
    assert!(diagram.contains("\tN5((key: 5<br/>height: 2))\n\t\tN5-->N1\n\t\tN5-->ER5((null))\n"));
}

#[test]
fn diagram_does_not_depend_on_addresses() {
    let first = SCENARIO.map(Data::new);
    let second = Box::new(SCENARIO.map(Data::new));

    let mut a = data_tree();
    let mut b = data_tree();
    for (x, y) in first.iter().zip(second.iter()) {
        a.insert(NonNull::from(x)).unwrap();
        b.insert(NonNull::from(y)).unwrap();
    }

    assert_eq!(a.mermaid().to_string(), b.mermaid().to_string());
}
