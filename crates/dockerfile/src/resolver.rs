use crate::annotation::AnnotationQueue;
use crate::instruction::Instruction;
use crate::types::DocItem;

/// Produces one [`DocItem`] per declared variable, label or port, in source
/// order.
pub fn resolve(instructions: &[Instruction]) -> Vec<DocItem> {
    let mut items = Vec::new();
    for instruction in instructions {
        resolve_instruction(instruction, &mut items);
    }
    items
}

fn resolve_instruction(instruction: &Instruction, items: &mut Vec<DocItem>) {
    let queue = AnnotationQueue::from_comments(&instruction.preceding_comments);

    for (index, arg) in instruction.args.iter().enumerate() {
        let annotation = queue.annotation_at(index);

        items.push(DocItem {
            name: annotation.name.unwrap_or_else(|| arg.key.clone()),
            item_type: instruction.kind,
            description: annotation.description.unwrap_or_default(),
            value: annotation
                .default
                .or_else(|| arg.value.clone())
                .unwrap_or_default(),
            required: annotation.required,
        });
    }
}
